//! One module per action-family, mirroring the groupings in spec §4.2's
//! action catalog.

pub mod bounty;
pub mod coop;
pub mod crime;
pub mod economy;
pub mod gang;
pub mod movement;
pub mod property;
pub mod social;
