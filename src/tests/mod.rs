pub mod determinism_tests;
