mod details;
mod grid;
mod settings;
mod sidebar;
mod top;
