use crate::server::telemetry::record_request;
use checklist_tonic_core::proto::helloworld::{HelloReply, HelloRequest, greeter_server::Greeter};
use std::time::Instant;
use tonic::{Request, Response, Status};

/// Stateless greeting service: one string in, one string out.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreeterService;

#[tonic::async_trait]
impl Greeter for GreeterService {
    /// Replies with `Hello {name}!`. Any name is accepted, including the
    /// empty string.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(name = %req.get_ref().name)))]
    async fn say_hello(&self, req: Request<HelloRequest>) -> Result<Response<HelloReply>, Status> {
        let start = Instant::now();
        let HelloRequest { name } = req.into_inner();

        let reply = HelloReply {
            message: format!("Hello {name}!"),
        };

        record_request("SayHello", start.elapsed().as_secs_f64() * 1000.0);
        Ok(Response::new(reply))
    }
}
