use std::{collections::HashMap, sync::Arc};

use crate::{
    models::{
        cart::{Cart, CartItem},
        course::{slugify, Course, CourseSection},
    },
    odoo::{OdooApi, OdooError},
};

/// Where course data comes from: the ERP when it is configured, otherwise
/// the built-in catalog.
#[derive(Clone)]
pub enum CourseCatalog {
    Odoo(Arc<dyn OdooApi>),
    Builtin,
}

impl CourseCatalog {
    pub fn new(odoo: Option<Arc<dyn OdooApi>>) -> Self {
        match odoo {
            Some(odoo) => CourseCatalog::Odoo(odoo),
            None => CourseCatalog::Builtin,
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            CourseCatalog::Odoo(_) => "odoo",
            CourseCatalog::Builtin => "builtin",
        }
    }

    pub async fn list(&self) -> Result<Vec<Course>, OdooError> {
        match self {
            CourseCatalog::Odoo(odoo) => odoo.list_courses().await,
            CourseCatalog::Builtin => Ok(builtin_courses()
                .into_iter()
                .map(|course| Course {
                    sections: Vec::new(),
                    ..course
                })
                .collect()),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Course>, OdooError> {
        match self {
            CourseCatalog::Odoo(odoo) => odoo.find_course_by_id(id).await,
            CourseCatalog::Builtin => Ok(builtin_courses().into_iter().find(|c| c.id == id)),
        }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, OdooError> {
        match self {
            CourseCatalog::Odoo(odoo) => odoo.find_course_by_slug(slug).await,
            CourseCatalog::Builtin => Ok(builtin_courses().into_iter().find(|c| c.slug == slug)),
        }
    }

    /// Rebuilds a cart read from the client against the catalog. Prices,
    /// titles and slugs come from the catalog; courses it does not offer are
    /// dropped.
    pub async fn reprice(&self, cart: &Cart) -> Result<Cart, OdooError> {
        if cart.is_empty() {
            return Ok(Cart::empty());
        }
        let courses: HashMap<i64, Course> = self
            .list()
            .await?
            .into_iter()
            .map(|course| (course.id, course))
            .collect();
        let items = cart
            .items
            .iter()
            .filter_map(|item| {
                let course = courses.get(&item.course_id)?;
                let mut priced = CartItem::from_course(course, None);
                priced.product_id = priced.product_id.or(item.product_id);
                Some(priced)
            })
            .collect();
        Ok(Cart::from_items(items))
    }
}

fn course(
    id: i64,
    title: &str,
    description: &str,
    price: f64,
    sections: Vec<(&str, Vec<&str>)>,
) -> Course {
    Course {
        id,
        slug: slugify(title, id),
        title: title.to_string(),
        description: description.to_string(),
        price,
        product_id: Some(id * 100),
        sections: sections
            .into_iter()
            .enumerate()
            .map(|(index, (title, lessons))| CourseSection {
                id: id * 100 + index as i64 + 1,
                title: title.to_string(),
                lessons: lessons.into_iter().map(str::to_string).collect(),
            })
            .collect(),
    }
}

pub fn builtin_courses() -> Vec<Course> {
    vec![
        course(
            1,
            "Data Science Fundamentals",
            "Statistics, Python and pandas from first principles to a portfolio project.",
            149.0,
            vec![
                ("Getting started", vec!["Welcome", "Setting up Python", "Jupyter basics"]),
                ("Working with data", vec!["pandas DataFrames", "Cleaning data", "Visualization"]),
                ("Statistics", vec!["Distributions", "Hypothesis testing"]),
            ],
        ),
        course(
            2,
            "Machine Learning in Practice",
            "Supervised and unsupervised learning with scikit-learn, end to end.",
            199.0,
            vec![
                ("Foundations", vec!["What is a model?", "Train/test splits"]),
                ("Supervised learning", vec!["Linear models", "Trees and ensembles"]),
                ("Shipping models", vec!["Evaluation", "Deployment"]),
            ],
        ),
        course(
            3,
            "SQL for Analysts",
            "Query, join and aggregate real business data with confidence.",
            79.0,
            vec![
                ("Queries", vec!["SELECT and WHERE", "Sorting and limits"]),
                ("Combining data", vec!["Joins", "Aggregations", "Window functions"]),
            ],
        ),
        course(
            4,
            "Data Visualization Storytelling",
            "Turn analyses into charts and dashboards that drive decisions.",
            99.0,
            vec![("Principles", vec!["Choosing a chart", "Color and layout"])],
        ),
    ]
}
