mod support;

mod resume_tests;
