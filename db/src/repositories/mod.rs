pub mod ticket_store;
pub mod user_directory;

pub use ticket_store::{SeaOrmTicketStore, StoreError, TicketFilter, TicketPatch, TicketStore};
pub use user_directory::{DisplayName, SeaOrmUserDirectory, UserDirectory, UserProfile};
