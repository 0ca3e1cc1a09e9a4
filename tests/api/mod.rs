mod handshake_tests;
mod health_tests;
