//! Whole-level scenarios: documents loaded, started, and rendered on the
//! headless backend
