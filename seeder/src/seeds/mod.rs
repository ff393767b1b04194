pub mod ombudsman_ticket;
pub mod user;
