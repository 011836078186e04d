mod environment;
mod logger;
