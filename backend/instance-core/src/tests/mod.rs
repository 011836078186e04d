mod browser;
mod discovery;
mod registry;
mod roster;
