mod http;
pub use self::http::{ClientError as HttpClientError, Provider as Http};

mod mock;
pub use mock::{MockGateway, MockResponse};
