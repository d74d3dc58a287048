use crudrouter::{CrudResource, Validatable, VersionedResource};
use sea_orm::{ActiveValue::NotSet, IntoActiveModel, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub active: bool,
    pub previous_version_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreate {
    pub title: String,
    pub body: String,
}

impl IntoActiveModel<ActiveModel> for DocumentCreate {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            title: Set(self.title),
            body: Set(self.body),
            active: Set(true),
            previous_version_id: Set(None),
        }
    }
}

impl Validatable for DocumentCreate {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Validatable for DocumentUpdate {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub active: bool,
    pub previous_version_id: Option<Uuid>,
}

pub struct Documents;

impl CrudResource for Documents {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Single = DocumentResponse;
    type Create = DocumentCreate;
    type Update = DocumentUpdate;

    const ID_COLUMN: Column = Column::Id;
    const ENTITY_NAME: &'static str = "Document";
}

impl VersionedResource for Documents {
    const ACTIVE_COLUMN: Column = Column::Active;
    const PREVIOUS_VERSION_COLUMN: Column = Column::PreviousVersionId;
}
