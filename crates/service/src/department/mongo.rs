use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Collection, Database};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use models::{BenefitRecord, Department, DepartmentInput, EmployeeRecord, ExternalId, Id};

use super::repository::DepartmentRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Stored shape of a department; unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct DepartmentDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_reference")]
    manager_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_references")]
    employee_ids: Option<Vec<String>>,
}

/// Reference fields may hold a string or an ObjectId, depending on which
/// service wrote them.
fn reference_string(value: Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

fn lenient_reference<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Bson>::deserialize(de)?.and_then(reference_string))
}

fn lenient_references<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(Option::<Vec<Bson>>::deserialize(de)?.map(|items| items.into_iter().filter_map(reference_string).collect()))
}

impl From<DepartmentDocument> for Department {
    fn from(d: DepartmentDocument) -> Self {
        Department {
            id: d.id.into(),
            name: d.name,
            location: d.location,
            manager_id: d.manager_id,
            employee_ids: d.employee_ids,
        }
    }
}

/// MongoDB-backed repository. All three collections are untyped so that
/// documents written by other services decode without a fixed schema.
#[derive(Clone)]
pub struct MongoDepartmentRepository {
    departments: Collection<Document>,
    employees: Collection<Document>,
    benefits: Collection<Document>,
}

impl MongoDepartmentRepository {
    pub fn new(db: &Database, collections: &configs::CollectionNames) -> Self {
        Self {
            departments: db.collection(&collections.department),
            employees: db.collection(&collections.employee),
            benefits: db.collection(&collections.benefit),
        }
    }

    async fn collect_departments(&self, filter: Document, page: Option<Pagination>) -> Result<Vec<Department>, ServiceError> {
        let mut find = self.departments.find(filter);
        if let Some(page) = page {
            if page.is_empty() {
                return Ok(Vec::new());
            }
            find = find.skip(page.skip).limit(page.limit_i64());
        }
        let docs: Vec<Document> = find.await?.try_collect().await?;
        docs.into_iter().map(department_from_document).collect()
    }
}

fn department_from_document(doc: Document) -> Result<Department, ServiceError> {
    Ok(bson::from_document::<DepartmentDocument>(doc)?.into())
}

/// Take `_id` out of a document another service owns. ObjectIds and strings
/// keep their usual form; any other key type is rendered as extended JSON.
fn take_external_id(doc: &mut Document) -> Result<ExternalId, ServiceError> {
    match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => Ok(oid.into()),
        Some(Bson::String(s)) => Ok(ExternalId::new(s)),
        Some(other) => Ok(ExternalId::new(match other.into_relaxed_extjson() {
            Value::String(s) => s,
            rendered => rendered.to_string(),
        })),
        None => Err(ServiceError::Internal("document without _id".into())),
    }
}

fn take_optional_string(doc: &mut Document, key: &str) -> Option<String> {
    doc.remove(key).and_then(reference_string)
}

fn take_string_array(doc: &mut Document, key: &str) -> Option<Vec<String>> {
    match doc.remove(key) {
        Some(Bson::Array(items)) => Some(items.into_iter().filter_map(reference_string).collect()),
        _ => None,
    }
}

/// Match a reference field holding either the string or, when the string is
/// an ObjectId, the ObjectId itself. Equality on an array field is a
/// membership test, so this covers `employee_ids` too.
fn reference_filter(field: &str, raw: &str) -> Document {
    let mut candidates = vec![Bson::String(raw.to_string())];
    if let Ok(oid) = ObjectId::parse_str(raw) {
        candidates.push(Bson::ObjectId(oid));
    }
    let mut filter = Document::new();
    filter.insert(field, doc! { "$in": candidates });
    filter
}

/// Remaining fields rendered as relaxed extended JSON.
fn into_json_map(doc: Document) -> Map<String, Value> {
    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn employee_from_document(mut doc: Document) -> Result<EmployeeRecord, ServiceError> {
    let id = take_external_id(&mut doc)?;
    let department_id = take_optional_string(&mut doc, "department_id");
    let benefits_id = take_string_array(&mut doc, "benefits_id");
    Ok(EmployeeRecord { id, department_id, benefits_id, extra: into_json_map(doc) })
}

fn benefit_from_document(mut doc: Document) -> Result<BenefitRecord, ServiceError> {
    let id = take_external_id(&mut doc)?;
    Ok(BenefitRecord { id, extra: into_json_map(doc) })
}

/// Case-insensitive substring filter; the needle is matched literally.
pub(crate) fn name_filter(name: &str) -> Document {
    doc! { "name": { "$regex": regex::escape(name), "$options": "i" } }
}

#[async_trait]
impl DepartmentRepository for MongoDepartmentRepository {
    async fn insert(&self, input: &DepartmentInput) -> Result<Id, ServiceError> {
        let doc = bson::to_document(input)?;
        let res = self.departments.insert_one(doc).await?;
        res.inserted_id
            .as_object_id()
            .map(Id::from)
            .ok_or_else(|| ServiceError::Internal("insert returned a non-ObjectId _id".into()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Department>, ServiceError> {
        self.departments
            .find_one(doc! { "_id": id.as_object_id() })
            .await?
            .map(department_from_document)
            .transpose()
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.departments.count_documents(doc! {}).await?)
    }

    async fn list(&self, page: Pagination) -> Result<Vec<Department>, ServiceError> {
        self.collect_departments(doc! {}, Some(page)).await
    }

    async fn update(&self, id: &Id, input: &DepartmentInput) -> Result<bool, ServiceError> {
        let set = bson::to_document(input)?;
        let res = self
            .departments
            .update_one(doc! { "_id": id.as_object_id() }, doc! { "$set": set })
            .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete(&self, id: &Id) -> Result<bool, ServiceError> {
        let res = self.departments.delete_one(doc! { "_id": id.as_object_id() }).await?;
        Ok(res.deleted_count > 0)
    }

    async fn clear_employee_department(&self, department_id: &str) -> Result<u64, ServiceError> {
        let res = self
            .employees
            .update_many(
                doc! { "department_id": department_id },
                doc! { "$set": { "department_id": Bson::Null } },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn find_by_name(&self, name: &str, page: Pagination) -> Result<Vec<Department>, ServiceError> {
        self.collect_departments(name_filter(name), Some(page)).await
    }

    async fn find_all_by_manager(&self, manager_id: &str) -> Result<Vec<Department>, ServiceError> {
        self.collect_departments(reference_filter("manager_id", manager_id), None).await
    }

    async fn find_all_by_employee(&self, employee_id: &str) -> Result<Vec<Department>, ServiceError> {
        self.collect_departments(reference_filter("employee_ids", employee_id), None).await
    }

    async fn find_all(&self) -> Result<Vec<Department>, ServiceError> {
        self.collect_departments(doc! {}, None).await
    }

    async fn find_employees_by_department(&self, department_id: &str) -> Result<Vec<EmployeeRecord>, ServiceError> {
        let docs: Vec<Document> = self
            .employees
            .find(doc! { "department_id": department_id })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(employee_from_document).collect()
    }

    async fn find_benefits_by_ids(&self, ids: &[Id]) -> Result<Vec<BenefitRecord>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let oids: Vec<ObjectId> = ids.iter().map(Id::as_object_id).collect();
        let docs: Vec<Document> = self.benefits.find(doc! { "_id": { "$in": oids } }).await?.try_collect().await?;
        docs.into_iter().map(benefit_from_document).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mongo_db;

    #[test]
    fn name_filter_escapes_metacharacters() {
        let filter = name_filter("R&D (Labs).*");
        let inner = filter.get_document("name").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), r"R\&D \(Labs\)\.\*");
        assert_eq!(inner.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn employee_document_keeps_unknown_fields() {
        let oid = ObjectId::new();
        let benefit = ObjectId::new();
        let doc = doc! {
            "_id": oid,
            "name": "Ana",
            "department_id": "65a1b2c3d4e5f60718293a4b",
            "benefits_id": [benefit.to_hex(), "bad"],
            "salary": 1200,
        };
        let emp = employee_from_document(doc).unwrap();
        assert_eq!(emp.id, ExternalId::from(oid));
        assert_eq!(emp.department_id.as_deref(), Some("65a1b2c3d4e5f60718293a4b"));
        assert_eq!(emp.benefits_id.as_ref().map(Vec::len), Some(2));
        assert_eq!(emp.extra.get("name"), Some(&Value::String("Ana".into())));
        assert_eq!(emp.extra.get("salary"), Some(&serde_json::json!(1200)));
        assert!(!emp.extra.contains_key("_id"));
    }

    #[test]
    fn null_department_decodes_as_none() {
        let emp = employee_from_document(doc! { "_id": ObjectId::new(), "department_id": Bson::Null }).unwrap();
        assert_eq!(emp.department_id, None);
        assert_eq!(emp.benefits_id, None);
    }

    #[test]
    fn foreign_ids_need_not_be_object_ids() {
        let emp = employee_from_document(doc! { "_id": "emp-001", "department_id": "d-1" }).unwrap();
        assert_eq!(emp.id, ExternalId::new("emp-001"));
        assert_eq!(emp.department_id.as_deref(), Some("d-1"));

        let numbered = employee_from_document(doc! { "_id": 42_i32 }).unwrap();
        assert_eq!(numbered.id.as_str(), "42");

        let benefit = benefit_from_document(doc! { "_id": "ben-9", "name": "Dental" }).unwrap();
        assert_eq!(benefit.id.as_str(), "ben-9");
        assert_eq!(benefit.extra.get("name"), Some(&Value::String("Dental".into())));

        assert!(employee_from_document(doc! { "name": "no key" }).is_err());
    }

    #[test]
    fn department_references_accept_object_ids() {
        let member = ObjectId::new();
        let manager = ObjectId::new();
        let dep = department_from_document(doc! {
            "_id": ObjectId::new(),
            "name": "Ops",
            "manager_id": manager,
            "employee_ids": [member, "e-2", 7_i32],
        })
        .unwrap();
        assert_eq!(dep.manager_id, Some(manager.to_hex()));
        assert_eq!(dep.employee_ids, Some(vec![member.to_hex(), "e-2".to_string()]));

        let bare = department_from_document(doc! { "_id": ObjectId::new(), "manager_id": Bson::Null }).unwrap();
        assert_eq!(bare.manager_id, None);
        assert_eq!(bare.employee_ids, None);
    }

    #[test]
    fn reference_filter_matches_both_encodings() {
        let oid = ObjectId::new();
        let filter = reference_filter("employee_ids", &oid.to_hex());
        let candidates = filter.get_document("employee_ids").unwrap().get_array("$in").unwrap();
        assert_eq!(candidates, &vec![Bson::String(oid.to_hex()), Bson::ObjectId(oid)]);

        let plain = reference_filter("manager_id", "m-1");
        let candidates = plain.get_document("manager_id").unwrap().get_array("$in").unwrap();
        assert_eq!(candidates, &vec![Bson::String("m-1".into())]);
    }

    #[test]
    fn department_document_ignores_extra_keys() {
        let oid = ObjectId::new();
        let dep = department_from_document(doc! { "_id": oid, "name": "Ops", "created_by": "seed" }).unwrap();
        assert_eq!(dep.id, Id::from(oid));
        assert_eq!(dep.name.as_deref(), Some("Ops"));
        assert_eq!(dep.location, None);
    }

    #[tokio::test]
    async fn mongo_round_trip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let Some(db) = mongo_db().await? else { return Ok(()); };
        let repo = MongoDepartmentRepository::new(&db, &configs::CollectionNames::default());

        let id = repo
            .insert(&DepartmentInput { name: Some("Engineering".into()), ..Default::default() })
            .await?;
        let dep_key = id.to_string();
        let emp_id = ObjectId::new();
        db.collection::<Document>("employee")
            .insert_one(doc! { "_id": emp_id, "department_id": dep_key.clone() })
            .await?;

        assert_eq!(repo.find_by_name("engine", Pagination::default()).await?.len(), 1);
        assert_eq!(repo.find_employees_by_department(&dep_key).await?.len(), 1);
        assert_eq!(repo.clear_employee_department(&dep_key).await?, 1);
        assert!(repo.delete(&id).await?);
        assert!(repo.find_by_id(&id).await?.is_none());

        db.drop().await?;
        Ok(())
    }
}
