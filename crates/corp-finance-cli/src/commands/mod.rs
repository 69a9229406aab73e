pub mod captable;
