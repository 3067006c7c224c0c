//! Typed ERP operations used by the route handlers.
//!
//! Handlers depend on the [`OdooApi`] trait so they can be exercised with a
//! mock; [`OdooClient`] implements it on top of `execute_kw`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::rpc::{OdooClient, OdooError};
use crate::models::{
    course::{slugify, Course, CourseSection},
    user::{NewUser, UserProfile},
};

const COURSE_MODEL: &str = "slide.channel";
const LESSON_MODEL: &str = "slide.slide";
const COURSE_FIELDS: [&str; 4] = ["id", "name", "description_short", "product_id"];
const USER_FIELDS: [&str; 5] = ["id", "login", "name", "email", "partner_id"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OdooApi: Send + Sync {
    /// Checks end-user credentials; `None` when they are rejected.
    async fn authenticate_user(&self, login: &str, password: &str)
        -> Result<Option<i64>, OdooError>;

    async fn read_user_profile(&self, uid: i64) -> Result<Option<UserProfile>, OdooError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<i64>, OdooError>;

    async fn create_partner(&self, name: &str, email: &str) -> Result<i64, OdooError>;

    async fn create_user(&self, user: &NewUser) -> Result<i64, OdooError>;

    /// Id of the `base.group_portal` group, if the ERP has it.
    async fn find_portal_group(&self) -> Result<Option<i64>, OdooError>;

    /// Replaces every group of the user with `group_ids`.
    async fn set_user_groups(&self, uid: i64, group_ids: Vec<i64>) -> Result<(), OdooError>;

    async fn list_courses(&self) -> Result<Vec<Course>, OdooError>;

    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>, OdooError>;

    /// Looks a course up by its `<words>-<id>` slug, sections included.
    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<Course>, OdooError>;

    async fn list_enrolled_courses(&self, partner_id: i64) -> Result<Vec<Course>, OdooError>;
}

#[async_trait]
impl OdooApi for OdooClient {
    async fn authenticate_user(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<i64>, OdooError> {
        self.authenticate_login(login, password).await
    }

    async fn read_user_profile(&self, uid: i64) -> Result<Option<UserProfile>, OdooError> {
        let records = self
            .execute_kw(
                "res.users",
                "read",
                json!([[uid]]),
                json!({ "fields": USER_FIELDS }),
            )
            .await?;
        let record = match as_records(records)?.into_iter().next() {
            Some(record) => record,
            None => return Ok(None),
        };
        Ok(Some(UserProfile {
            uid: record.get("id").and_then(Value::as_i64).unwrap_or(uid),
            login: text_field(record.get("login")).unwrap_or_default(),
            name: text_field(record.get("name")),
            email: text_field(record.get("email")),
            partner_id: record.get("partner_id").and_then(many2one_id),
        }))
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<i64>, OdooError> {
        let ids = self
            .execute_kw(
                "res.users",
                "search",
                json!([[["login", "=", login]]]),
                json!({ "limit": 1 }),
            )
            .await?;
        Ok(ids
            .as_array()
            .and_then(|ids| ids.first())
            .and_then(Value::as_i64))
    }

    async fn create_partner(&self, name: &str, email: &str) -> Result<i64, OdooError> {
        let created = self
            .execute_kw(
                "res.partner",
                "create",
                json!([{ "name": name, "email": email }]),
                json!({}),
            )
            .await?;
        created_id(&created)
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64, OdooError> {
        let created = self
            .execute_kw(
                "res.users",
                "create",
                json!([{
                    "name": user.name,
                    "login": user.login,
                    "password": user.password,
                    "partner_id": user.partner_id,
                }]),
                json!({}),
            )
            .await?;
        created_id(&created)
    }

    async fn find_portal_group(&self) -> Result<Option<i64>, OdooError> {
        let records = self
            .execute_kw(
                "ir.model.data",
                "search_read",
                json!([[
                    ["module", "=", "base"],
                    ["name", "=", "group_portal"],
                    ["model", "=", "res.groups"]
                ]]),
                json!({ "fields": ["res_id"], "limit": 1 }),
            )
            .await?;
        Ok(as_records(records)?
            .first()
            .and_then(|record| record.get("res_id"))
            .and_then(Value::as_i64))
    }

    async fn set_user_groups(&self, uid: i64, group_ids: Vec<i64>) -> Result<(), OdooError> {
        // (6, 0, ids) replaces the whole many2many set.
        self.execute_kw(
            "res.users",
            "write",
            json!([[uid], { "groups_id": [[6, 0, group_ids]] }]),
            json!({}),
        )
        .await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, OdooError> {
        self.search_courses(json!([["is_published", "=", true]]), None)
            .await
    }

    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>, OdooError> {
        let mut courses = self
            .search_courses(
                json!([["id", "=", id], ["is_published", "=", true]]),
                Some(1),
            )
            .await?;
        Ok(courses.pop())
    }

    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<Course>, OdooError> {
        let id = match slug_id(slug) {
            Some(id) => id,
            None => return Ok(None),
        };
        let mut course = match self.find_course_by_id(id).await? {
            Some(course) => course,
            None => return Ok(None),
        };
        course.sections = self.course_sections(&course).await?;
        Ok(Some(course))
    }

    async fn list_enrolled_courses(&self, partner_id: i64) -> Result<Vec<Course>, OdooError> {
        self.search_courses(json!([["partner_ids", "in", [partner_id]]]), None)
            .await
    }
}

impl OdooClient {
    async fn search_courses(
        &self,
        domain: Value,
        limit: Option<u32>,
    ) -> Result<Vec<Course>, OdooError> {
        let mut kwargs = json!({ "fields": COURSE_FIELDS, "order": "id asc" });
        if let Some(limit) = limit {
            kwargs["limit"] = json!(limit);
        }
        let records = as_records(
            self.execute_kw(COURSE_MODEL, "search_read", json!([domain]), kwargs)
                .await?,
        )?;

        let product_ids: Vec<i64> = records
            .iter()
            .filter_map(|record| record.get("product_id").and_then(many2one_id))
            .collect();
        let prices = self.product_prices(&product_ids).await?;

        records
            .iter()
            .map(|record| course_from_record(record, &prices))
            .collect()
    }

    async fn product_prices(&self, product_ids: &[i64]) -> Result<HashMap<i64, f64>, OdooError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let records = as_records(
            self.execute_kw(
                "product.product",
                "read",
                json!([product_ids]),
                json!({ "fields": ["id", "list_price"] }),
            )
            .await?,
        )?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let id = record.get("id").and_then(Value::as_i64)?;
                let price = record.get("list_price").and_then(Value::as_f64)?;
                Some((id, price))
            })
            .collect())
    }

    async fn course_sections(&self, course: &Course) -> Result<Vec<CourseSection>, OdooError> {
        let records = as_records(
            self.execute_kw(
                LESSON_MODEL,
                "search_read",
                json!([[["channel_id", "=", course.id], ["is_published", "=", true]]]),
                json!({
                    "fields": ["id", "name", "is_category"],
                    "order": "sequence asc, id asc"
                }),
            )
            .await?,
        )?;
        Ok(group_sections(&course.title, &records))
    }
}

/// Folds an ordered lesson list into sections. Category rows open a new
/// section; lessons before the first category land in a section named after
/// the course.
fn group_sections(course_title: &str, records: &[Value]) -> Vec<CourseSection> {
    let mut sections: Vec<CourseSection> = Vec::new();
    for record in records {
        let id = record.get("id").and_then(Value::as_i64).unwrap_or_default();
        let name = text_field(record.get("name")).unwrap_or_default();
        let is_category = record
            .get("is_category")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if is_category {
            sections.push(CourseSection {
                id,
                title: name,
                lessons: Vec::new(),
            });
            continue;
        }
        if sections.is_empty() {
            sections.push(CourseSection {
                id: 0,
                title: course_title.to_string(),
                lessons: Vec::new(),
            });
        }
        if let Some(section) = sections.last_mut() {
            section.lessons.push(name);
        }
    }
    sections
}

fn course_from_record(record: &Value, prices: &HashMap<i64, f64>) -> Result<Course, OdooError> {
    let id = record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| OdooError::UnexpectedResponse("course record without id".into()))?;
    let title = text_field(record.get("name")).unwrap_or_default();
    let product_id = record.get("product_id").and_then(many2one_id);
    Ok(Course {
        id,
        slug: slugify(&title, id),
        description: text_field(record.get("description_short")).unwrap_or_default(),
        price: product_id
            .and_then(|pid| prices.get(&pid).copied())
            .unwrap_or(0.0),
        title,
        product_id,
        sections: Vec::new(),
    })
}

fn as_records(value: Value) -> Result<Vec<Value>, OdooError> {
    match value {
        Value::Array(records) => Ok(records),
        other => Err(OdooError::UnexpectedResponse(format!(
            "expected a record list, got {}",
            other
        ))),
    }
}

/// `create` answers with an id, or a one-element id list on newer servers.
fn created_id(value: &Value) -> Result<i64, OdooError> {
    value
        .as_i64()
        .or_else(|| value.as_array()?.first()?.as_i64())
        .ok_or_else(|| OdooError::UnexpectedResponse(format!("create returned {}", value)))
}

/// Many2one values come back as `[id, "Display Name"]` or `false`.
fn many2one_id(value: &Value) -> Option<i64> {
    match value {
        Value::Array(pair) => pair.first().and_then(Value::as_i64),
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
}

/// Empty char fields come back as `false`.
fn text_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn slug_id(slug: &str) -> Option<i64> {
    slug.rsplit('-').next()?.parse().ok().filter(|id| *id > 0)
}
