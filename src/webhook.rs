use crate::bot::{self, BotAction};
use crate::client::ResourceClient;
use crate::format;
use crate::saga;
use crate::submission::{FormSubmission, Submission};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

const REPORT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Report a sighting</title></head>
<body>
<h1>Report a sighting</h1>
<form action="/read_form" method="post">
  <label>Plate <input name="platecode" required></label><br>
  <label>Time <input name="sighttime" type="datetime-local" required></label><br>
  <label>Latitude <input name="latitude" required></label><br>
  <label>Longitude <input name="longitude" required></label><br>
  <label>Make <input name="vehiclemake"></label><br>
  <label>Model <input name="vehiclemodel"></label><br>
  <label>Color <input name="vehiclecolor"></label><br>
  <label>Year <input name="vehicleyear" type="number"></label><br>
  <button type="submit">Submit</button>
</form>
</body>
</html>
"#;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub actions: Vec<BotAction>,
}

pub fn routes(
    client: Arc<ResourceClient>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let read_form = warp::post()
        .and(warp::path!("read_form"))
        .and(warp::body::form())
        .and(with_client(client.clone()))
        .and_then(handle_form);
    let report = warp::get()
        .and(warp::path!("report"))
        .map(|| warp::reply::html(REPORT_PAGE));
    let platecheck = warp::post()
        .and(warp::path!("platecheck"))
        .and(warp::body::json())
        .and(with_client(client))
        .and_then(handle_chat);
    read_form.or(report).or(platecheck)
}

pub async fn run(addr: SocketAddr, client: Arc<ResourceClient>) {
    info!("Listening for sightings on {}", addr);
    warp::serve(routes(client)).run(addr).await;
}

fn with_client(
    client: Arc<ResourceClient>,
) -> impl Filter<Extract = (Arc<ResourceClient>,), Error = Infallible> + Clone {
    warp::any().map(move || client.clone())
}

async fn handle_form(
    form: FormSubmission,
    client: Arc<ResourceClient>,
) -> Result<impl warp::Reply, Infallible> {
    info!("Form submission received: {:?}", form);
    let result = match Submission::from_form(form) {
        Ok(submission) => saga::post_sighting(&client, &submission)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match &result {
        Ok(receipt) => info!(
            "Form submission processed successfully; plate ID {}",
            receipt.plate_id
        ),
        Err(e) => error!("Error processing form submission: {}", e),
    }
    Ok(format::form_message(&result))
}

async fn handle_chat(
    request: ChatRequest,
    client: Arc<ResourceClient>,
) -> Result<impl warp::Reply, Infallible> {
    let actions = bot::handle(&client, &request.text).await;
    Ok(warp::reply::json(&ChatResponse { actions }))
}
