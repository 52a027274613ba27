pub mod http;
pub mod api_client;
pub mod scheduler;

pub use http::{GlooTransport, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartFile, RequestBody};
pub use api_client::ApiClient;
pub use scheduler::{BrowserScheduler, BrowserSpawner, IntervalScheduler, PollScope, TaskSpawner, TimerHandle};
