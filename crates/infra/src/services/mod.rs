mod expo_push;

pub use expo_push::{ExpoPushGateway, IPushGateway, InMemoryPushGateway};
