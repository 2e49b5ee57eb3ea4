//! gRPC service implementation for the checklist store.
//!
//! This module defines [`ChecklistService`], the concrete implementation of
//! the [`Checklist`] gRPC service defined in `proto/checklist.proto`.
//!
//! ## Responsibilities
//!
//! - Validate request text with the store's own [`Limits`], so errors are
//!   classified the same whether a request enters here or calls the store
//!   directly.
//! - Reject malformed ids as `INVALID_ARGUMENT`; well-formed ids that name
//!   nothing are `NOT_FOUND`.
//! - Call exactly one store operation per request.
//! - Map store snapshots to replies and failures to `tonic::Status`.
//! - Refuse new work once shutdown has begun.
//!
//! The service keeps no data of its own; every clone shares the same store.
//!
//! [`Limits`]: checklist_tonic_core::checklist::Limits

use crate::server::telemetry::{increment_errors, record_request};
use checklist_tonic_core::{
    Error,
    checklist::Store,
    proto::checklist::{
        AddListRequest, AddTodoRequest, EmptyReply, GetListRequest, GetTodoRequest, ListReply,
        RemoveListRequest, RemoveTodoRequest, TodoReply, UpdateListRequest, UpdateTodoRequest,
        checklist_server::Checklist,
    },
    types::{parse_list_id, parse_todo_id},
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

/// gRPC front end of a shared [`Store`].
#[derive(Clone, Debug)]
pub struct ChecklistService {
    store: Arc<Store>,
    shutdown_token: CancellationToken,
}

impl ChecklistService {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Stops accepting requests. Requests arriving afterwards fail with
    /// `UNAVAILABLE`; requests already inside the store complete normally.
    pub fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            lists = self.store.len_lists(),
            todos = self.store.len_todos(),
            "Checklist service shutting down"
        );
        self.shutdown_token.cancel();
    }

    /// Runs one store operation unless the service is shutting down.
    fn run<T>(
        &self,
        op: impl FnOnce(&Store) -> checklist_tonic_core::checklist::Result<T>,
    ) -> Result<T, Error> {
        if self.shutdown_token.is_cancelled() {
            return Err(Error::ServiceShutdown);
        }
        Ok(op(&self.store)?)
    }
}

/// Records telemetry for a finished request and converts the outcome into a
/// gRPC response.
fn finish<T>(
    method: &'static str,
    start: Instant,
    result: Result<T, Error>,
) -> Result<Response<T>, Status> {
    record_request(method, start.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(reply) => Ok(Response::new(reply)),
        Err(err) => {
            let status = Status::from(err);
            increment_errors(method, status.code());

            #[cfg(feature = "tracing")]
            match status.code() {
                tonic::Code::Internal => {
                    tracing::error!(method, message = status.message(), "request failed")
                }
                code => tracing::debug!(method, ?code, message = status.message(), "request rejected"),
            }

            Err(status)
        }
    }
}

#[tonic::async_trait]
impl Checklist for ChecklistService {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn add_list(&self, req: Request<AddListRequest>) -> Result<Response<ListReply>, Status> {
        let start = Instant::now();
        let AddListRequest { name } = req.into_inner();

        let result = self.run(|store| {
            store.limits().check_text("name", &name)?;
            store.add_list(&name)
        });

        finish("AddList", start, result.map(ListReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn get_list(&self, req: Request<GetListRequest>) -> Result<Response<ListReply>, Status> {
        let start = Instant::now();
        let GetListRequest { id } = req.into_inner();

        let result = self.run(|store| store.get_list(&parse_list_id("id", &id)?));

        finish("GetList", start, result.map(ListReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn update_list(
        &self,
        req: Request<UpdateListRequest>,
    ) -> Result<Response<ListReply>, Status> {
        let start = Instant::now();
        let UpdateListRequest { id, name } = req.into_inner();

        let result = self.run(|store| {
            store.limits().check_text("name", &name)?;
            store.update_list(&parse_list_id("id", &id)?, &name)
        });

        finish("UpdateList", start, result.map(ListReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn remove_list(
        &self,
        req: Request<RemoveListRequest>,
    ) -> Result<Response<EmptyReply>, Status> {
        let start = Instant::now();
        let RemoveListRequest { id } = req.into_inner();

        let result = self.run(|store| store.remove_list(&parse_list_id("id", &id)?));

        finish("RemoveList", start, result.map(|()| EmptyReply {}))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(list_id = %req.get_ref().list_id)))]
    async fn add_todo(&self, req: Request<AddTodoRequest>) -> Result<Response<TodoReply>, Status> {
        let start = Instant::now();
        let AddTodoRequest {
            list_id,
            description,
        } = req.into_inner();

        let result = self.run(|store| {
            store.limits().check_text("description", &description)?;
            store.add_todo(&parse_list_id("list_id", &list_id)?, &description)
        });

        finish("AddTodo", start, result.map(TodoReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn get_todo(&self, req: Request<GetTodoRequest>) -> Result<Response<TodoReply>, Status> {
        let start = Instant::now();
        let GetTodoRequest { id } = req.into_inner();

        let result = self.run(|store| store.get_todo(&parse_todo_id("id", &id)?));

        finish("GetTodo", start, result.map(TodoReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn update_todo(
        &self,
        req: Request<UpdateTodoRequest>,
    ) -> Result<Response<TodoReply>, Status> {
        let start = Instant::now();
        let UpdateTodoRequest {
            id,
            description,
            done,
        } = req.into_inner();

        let result = self.run(|store| {
            store
                .limits()
                .check_optional_text("description", description.as_deref())?;
            store.update_todo(&parse_todo_id("id", &id)?, description.as_deref(), done)
        });

        finish("UpdateTodo", start, result.map(TodoReply::from))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %req.get_ref().id)))]
    async fn remove_todo(
        &self,
        req: Request<RemoveTodoRequest>,
    ) -> Result<Response<EmptyReply>, Status> {
        let start = Instant::now();
        let RemoveTodoRequest { id } = req.into_inner();

        let result = self.run(|store| store.remove_todo(&parse_todo_id("id", &id)?));

        finish("RemoveTodo", start, result.map(|()| EmptyReply {}))
    }
}
