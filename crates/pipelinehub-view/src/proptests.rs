//! Property tests for filtering, sorting and aggregation.
