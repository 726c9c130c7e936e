// Test helpers for export pipeline testing
