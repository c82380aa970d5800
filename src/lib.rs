//! A mobile wallet ledger: accounts, PIN protected transfers, fraud screening and money requests.
//!
//! The [`ledger`] module holds the domain logic, [`io`] the CSV formats of the replay tool,
//! and [`processors`] the loop that connects both.

pub mod config;
pub mod io;
pub mod ledger;
pub mod logging;
pub mod processors;
