//! Binary-level tests: the full mount → fetch → transform → render lifecycle,
//! driven against local listeners instead of the real service.
