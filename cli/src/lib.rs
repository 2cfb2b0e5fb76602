//! adirf library: keeps a frida-server agent installed, placed and running
//! on a rooted Android device through a superuser shell.
//!
//! Layers follow the usual split: `domain` holds pure types, `application`
//! holds ports and services, `infra` implements the ports, `output` renders
//! results and `commands` wires everything to the CLI.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod infra;
pub mod output;
