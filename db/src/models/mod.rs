pub mod ombudsman_ticket;
pub mod system_setting;
pub mod user;

pub use ombudsman_ticket::Entity as OmbudsmanTicket;
pub use system_setting::Entity as SystemSetting;
pub use user::Entity as User;
