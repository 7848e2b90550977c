//! Cross-cutting helpers shared by the services and handlers.

pub mod db_errors;
