//! Application core: indicator control without direct I/O.
//!
//! The controller runs one indicator's state machine; the service owns the
//! arena of indicators and the control-plane API.  All interaction with
//! hardware happens through the **port traits** defined in [`ports`].

pub mod commands;
pub mod controller;
pub mod ports;
pub mod service;
