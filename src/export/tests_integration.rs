// Integration tests for export workflows
// These tests verify end-to-end functionality across multiple modules
