use super::types::{Interpellation, NewInterpellation, Page, Person, PersonForm};
use super::{ApiClient, file_part};
use crate::error::ApiResult;
use reqwest::Method;
use reqwest::multipart::Form;

pub(crate) trait PersonsApi {
    async fn get_persons(&self, page: u32, search: Option<&str>) -> ApiResult<Page<Person>>;
    async fn get_person(&self, id: i64) -> ApiResult<Person>;
    async fn create_person(&self, req: &PersonForm) -> ApiResult<Person>;
    async fn update_person(&self, id: i64, req: &PersonForm) -> ApiResult<Person>;
    async fn delete_person(&self, id: i64) -> ApiResult<()>;
    async fn get_interpellations(&self, person_id: i64) -> ApiResult<Vec<Interpellation>>;
    async fn add_interpellation(
        &self,
        person_id: i64,
        req: &NewInterpellation,
    ) -> ApiResult<Interpellation>;
    async fn get_person_statistics(&self) -> ApiResult<serde_json::Value>;
}

async fn person_form(req: &PersonForm) -> ApiResult<Form> {
    let mut form = Form::new()
        .text("name", req.name.clone())
        .text("cin", req.cin.clone())
        .text("status", req.status.as_str());
    if let Some(photo) = &req.photo {
        form = form.part("photo", file_part(photo).await?);
    }
    Ok(form)
}

impl PersonsApi for ApiClient {
    async fn get_persons(&self, page: u32, search: Option<&str>) -> ApiResult<Page<Person>> {
        let mut builder = self
            .request(Method::GET, "personnes")
            .query(&[("page", page.to_string())]);
        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            builder = builder.query(&[("search", term.trim())]);
        }
        self.page(builder).await
    }

    async fn get_person(&self, id: i64) -> ApiResult<Person> {
        self.data(self.request(Method::GET, &format!("personnes/{id}")))
            .await
    }

    async fn create_person(&self, req: &PersonForm) -> ApiResult<Person> {
        let form = person_form(req).await?;
        tracing::info!(cin = %req.cin, "registering person");
        self.data(self.request(Method::POST, "personnes").multipart(form))
            .await
    }

    // Multipart bodies cannot ride a PUT on the backend, so the verb is
    // spoofed through `_method`.
    async fn update_person(&self, id: i64, req: &PersonForm) -> ApiResult<Person> {
        let form = person_form(req).await?.text("_method", "PUT");
        self.data(
            self.request(Method::POST, &format!("personnes/{id}"))
                .multipart(form),
        )
        .await
    }

    async fn delete_person(&self, id: i64) -> ApiResult<()> {
        tracing::info!(id, "moving person to trash");
        self.ack(self.request(Method::DELETE, &format!("personnes/{id}")))
            .await?;
        Ok(())
    }

    async fn get_interpellations(&self, person_id: i64) -> ApiResult<Vec<Interpellation>> {
        Ok(self
            .page(self.request(
                Method::GET,
                &format!("personnes/{person_id}/interpellations"),
            ))
            .await?
            .items)
    }

    async fn add_interpellation(
        &self,
        person_id: i64,
        req: &NewInterpellation,
    ) -> ApiResult<Interpellation> {
        tracing::info!(person_id, "recording interpellation");
        self.data(
            self.request(
                Method::POST,
                &format!("personnes/{person_id}/interpellations"),
            )
            .json(req),
        )
        .await
    }

    async fn get_person_statistics(&self) -> ApiResult<serde_json::Value> {
        self.data(self.request(Method::GET, "personnes-statistics"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::api::types::PersonStatus;
    use axum::extract::{Multipart, Path, Query};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[tokio::test]
    async fn blank_search_is_not_sent() {
        let router = Router::new().route(
            "/api/personnes",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert!(!q.contains_key("search"));
                Json(json!({"success": true, "data": []}))
            }),
        );
        let client = mock::serve(router).await;
        let page = client.get_persons(1, Some("   ")).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn single_person_is_fetched_by_id() {
        let router = Router::new().route(
            "/api/personnes/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"success": true, "data": {
                    "id": id,
                    "name": "Karim B.",
                    "cin": "AB123456",
                    "status": "internal",
                    "photo": "personnes/karim.jpg"
                }}))
            }),
        );
        let client = mock::serve(router).await;

        let person = client.get_person(3).await.unwrap();

        assert_eq!(person.id, 3);
        assert_eq!(person.status, PersonStatus::Internal);
        assert_eq!(person.photo.as_deref(), Some("personnes/karim.jpg"));
    }

    #[tokio::test]
    async fn update_spoofs_put_over_multipart() {
        let router = Router::new().route(
            "/api/personnes/{id}",
            post(|Path(id): Path<i64>, mut multipart: Multipart| async move {
                let mut fields = HashMap::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    fields.insert(name, field.text().await.unwrap());
                }
                assert_eq!(fields.get("_method").map(String::as_str), Some("PUT"));
                Json(json!({"success": true, "data": {
                    "id": id,
                    "name": fields["name"],
                    "cin": fields["cin"],
                    "status": fields["status"],
                    "photo": null
                }}))
            }),
        );
        let client = mock::serve(router).await;

        let person = client
            .update_person(
                3,
                &PersonForm {
                    name: "Karim B.".into(),
                    cin: "AB123456".into(),
                    status: PersonStatus::External,
                    photo: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(person.status, PersonStatus::External);
        assert!(person.interpellations.is_empty());
    }

    #[tokio::test]
    async fn interpellation_is_posted_under_the_person() {
        let router = Router::new().route(
            "/api/personnes/{id}/interpellations",
            post(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                Json(json!({"success": true, "data": {
                    "id": 90,
                    "person_id": id,
                    "fact": body["fact"],
                    "occurred_at": body["occurred_at"]
                }}))
            }),
        );
        let client = mock::serve(router).await;

        let record = client
            .add_interpellation(
                12,
                &NewInterpellation {
                    fact: "Accès non autorisé au quai 5".into(),
                    occurred_at: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(record.person_id, Some(12));
        assert_eq!(record.fact, "Accès non autorisé au quai 5");
    }
}
