//! Client for the public hh.ru vacancy API: paginated search plus
//! per-vacancy detail fetches, strictly sequential with fixed delays.

mod client;
mod models;

pub use client::{HhClient, HhError, DEFAULT_QUERIES};
pub use models::{Employer, Named, Salary, SearchHit, SearchPage, VacancyDetail};
