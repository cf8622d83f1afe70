use rocket::Route;

mod common;
mod election;
mod vote;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(voter::routes());
    routes.extend(election::routes());
    routes.extend(vote::routes());
    routes
}
