//! Integration tests for topic-sieve

mod crawl_tests;
