use crate::server::ServerRouter;

pub(crate) mod pages;
mod posts;

pub fn routes() -> ServerRouter {
    ServerRouter::new().merge(pages::routes()).merge(posts::routes())
}
