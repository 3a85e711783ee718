//! `AlertStore` backends: the hosted Supabase table and a process-local map.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAlertStore;
pub use supabase::SupabaseAlertStore;
