//! Demo client: greets the server, then walks a list through its lifecycle.

use checklist_tonic_core::proto::{
    checklist::{
        AddListRequest, AddTodoRequest, GetTodoRequest, RemoveListRequest, UpdateTodoRequest,
        checklist_client::ChecklistClient,
    },
    helloworld::{HelloRequest, greeter_client::GreeterClient},
};
use clap::Parser;
use tonic::{Code, transport::Channel};

#[derive(Parser, Debug)]
#[command(
    name = "checklist-client",
    version,
    about = "Exercises a running checklist server"
)]
struct ClientArgs {
    /// Server endpoint URI.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("http://127.0.0.1:50051"))]
    server_addr: String,

    /// Name sent in the greeting.
    #[arg(long, default_value_t = String::from("world"))]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = ClientArgs::parse();

    let channel = Channel::from_shared(args.server_addr)?.connect().await?;
    let mut greeter = GreeterClient::new(channel.clone());
    let mut checklist = ChecklistClient::new(channel);

    let reply = greeter
        .say_hello(HelloRequest { name: args.name })
        .await?
        .into_inner();
    println!("Greeting: {}", reply.message);

    let list = checklist
        .add_list(AddListRequest {
            name: "TODOs".into(),
        })
        .await?
        .into_inner();
    println!("Added list {:?} ({})", list.name, list.id);

    let todo = checklist
        .add_todo(AddTodoRequest {
            list_id: list.id.clone(),
            description: "Get groceries".into(),
        })
        .await?
        .into_inner();
    println!("Added todo {:?} ({}), done={}", todo.description, todo.id, todo.done);

    let todo = checklist
        .update_todo(UpdateTodoRequest {
            id: todo.id,
            description: None,
            done: Some(true),
        })
        .await?
        .into_inner();
    println!("Updated todo {}, done={}", todo.id, todo.done);

    checklist
        .remove_list(RemoveListRequest {
            id: list.id.clone(),
        })
        .await?;
    println!("Removed list {}", list.id);

    match checklist.get_todo(GetTodoRequest { id: todo.id }).await {
        Err(status) if status.code() == Code::NotFound => {
            println!("Todo removed with its list: {}", status.message());
        }
        Err(status) => return Err(status.into()),
        Ok(reply) => anyhow::bail!("todo {} outlived its list", reply.into_inner().id),
    }

    Ok(())
}
