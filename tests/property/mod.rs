//! Property-based tests for comparison hashing and optional paths
