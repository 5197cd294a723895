mod differential_tests;
mod vector_tests;
