pub mod emi;
pub mod loan;
pub mod schedule;
