// Interface adapters: ERP client, wire protocol, rendering and HTTP/WebSocket handling.

pub mod clients;
pub mod handlers;
pub mod http;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod view;
