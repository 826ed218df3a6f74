mod objects;
mod registered;
