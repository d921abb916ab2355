pub mod wish_handlers;
