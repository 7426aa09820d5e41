mod batches;
mod reconcile;
mod stale_loads;
