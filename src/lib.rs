#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod controller;
pub mod effective_mass_matrix;
pub mod error;
pub mod link;
pub mod manipulator;
pub mod math;
pub mod pose;
pub mod robot;
pub mod task;
pub mod transform;
pub mod types;
pub mod util;

pub mod helpers;

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f64::consts::PI;

pub const WORLD_FRAME: &str = "world";
