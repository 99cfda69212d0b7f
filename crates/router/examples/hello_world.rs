use micro_router::{Router, Server, handlers};

#[tokio::main]
async fn main() {
    let router = Router::builder().get("/", handlers![|ctx| ctx.send("hello world")]).build().unwrap();

    Server::builder().router(router).address("127.0.0.1:3000").build().unwrap().start().await.unwrap();
}
