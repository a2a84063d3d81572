//! Concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to                     |
//! |------------|--------------|---------------------------------|
//! | `hardware` | ActuatorPort | OutputDriver + delay timer bank |

pub mod hardware;
