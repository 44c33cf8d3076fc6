pub mod schedule_cache;
