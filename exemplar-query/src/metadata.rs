//! Per-instance entity metadata.
//!
//! [`EntityMetadata::describe`] pairs the registered [`ClassMetadata`] of a
//! type with the current values of one instance. The result is a fresh,
//! immutable snapshot; nothing is cached between calls.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::trace;

use exemplar_schema::{ClassMetadata, ComponentField, MetadataProvider, TypeKind, Value};

use crate::error::{QueryError, QueryResult};

/// One persistent property of a described instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: SmolStr,
    kind: TypeKind,
    value: Option<Value>,
    nullable: bool,
    lazy: bool,
}

impl Property {
    /// Get the property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the type classification.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Get the current value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Check whether storage permits absence.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Check whether loading is deferred.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }
}

/// The identifier of a described instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    value: Option<Value>,
    property_name: SmolStr,
    kind: TypeKind,
}

impl Identifier {
    /// Get the current identifier value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Get the name the identifier is addressed by.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Get the identifier classification.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Check for a single-column identifier.
    ///
    /// True unless the classification is composite, polymorphic, an
    /// association or a collection.
    pub fn is_single(&self) -> bool {
        !(self.kind.is_composite() || self.kind.is_foreign_key_driven())
    }

    /// Check for a composite identifier.
    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }
}

/// Identifier and ordered properties of one entity instance.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    class: Arc<ClassMetadata>,
    identifier: Identifier,
    properties: Vec<Property>,
}

impl EntityMetadata {
    /// Describe an instance through a metadata provider.
    ///
    /// Fails with `MetadataUnavailable` when `E` is not registered.
    pub fn describe<E, P>(entity: &E, provider: &P) -> QueryResult<Self>
    where
        E: Any,
        P: MetadataProvider + ?Sized,
    {
        let class = provider
            .class_metadata(TypeId::of::<E>())
            .ok_or_else(|| QueryError::metadata_unavailable(type_name::<E>()))?;
        Self::from_class(entity, class)
    }

    /// Describe a type-erased instance with known class metadata.
    pub fn from_class(entity: &dyn Any, class: Arc<ClassMetadata>) -> QueryResult<Self> {
        let not_an_instance = || {
            QueryError::internal(format!(
                "instance is not a `{}` as its metadata declares",
                class.type_name()
            ))
            .with_model(class.entity_name())
        };

        let values = class.property_values(entity).ok_or_else(not_an_instance)?;
        let id_value = class.identifier_value(entity).ok_or_else(not_an_instance)?;

        let properties = class
            .columns()
            .zip(values)
            .map(|(column, value)| Property {
                name: SmolStr::from(column.name()),
                kind: column.kind().clone(),
                value,
                nullable: column.is_nullable(),
                lazy: column.is_lazy(),
            })
            .collect::<Vec<_>>();

        let identifier = Identifier {
            value: id_value,
            property_name: SmolStr::from(class.identifier_property_name()),
            kind: class.identifier_type().clone(),
        };

        trace!(
            entity = class.entity_name(),
            properties = properties.len(),
            identifier_present = identifier.value.is_some(),
            "Described entity instance"
        );

        Ok(Self {
            class,
            identifier,
            properties,
        })
    }

    /// Get the entity name.
    pub fn entity_name(&self) -> &str {
        self.class.entity_name()
    }

    /// Get the class metadata this snapshot was built from.
    pub fn class(&self) -> &Arc<ClassMetadata> {
        &self.class
    }

    /// Get the identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Get the properties in mapping order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// See [`Identifier::is_single`].
    pub fn has_single_identifier(&self) -> bool {
        self.identifier.is_single()
    }

    /// See [`Identifier::is_composite`].
    pub fn has_composite_identifier(&self) -> bool {
        self.identifier.is_composite()
    }

    /// Read every sub-field of a composite identifier as `(path, value)`.
    ///
    /// Paths are `<identifier>.<sub-field>` in declaration order. An absent
    /// identifier yields no entries. Any failed read is a `FieldAccess` error.
    pub fn composite_identifier_values(&self) -> QueryResult<Vec<(String, Option<Value>)>> {
        let TypeKind::Composite(descriptor) = self.identifier.kind() else {
            return Err(QueryError::unsupported_identifier_kind(
                self.entity_name(),
                self.identifier.kind().to_string(),
            ));
        };
        let Some(value) = self.identifier.value() else {
            return Ok(Vec::new());
        };

        descriptor
            .fields()
            .iter()
            .map(|field| {
                let path = format!("{}.{}", self.identifier.property_name(), field.name());
                let sub_value = read_sub_field(self.entity_name(), &path, value, field)?;
                Ok((path, sub_value))
            })
            .collect()
    }

    /// Resolve a property path to its current value.
    ///
    /// Accepts a property name, the identifier name, or a dotted
    /// `<name>.<sub-field>` path into a component-typed property or identifier.
    pub fn value_at(&self, path: &str) -> QueryResult<Option<Value>> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        let (kind, value) = if head == self.identifier.property_name() {
            (self.identifier.kind(), self.identifier.value())
        } else if let Some(property) = self.property(head) {
            (property.kind(), property.value())
        } else {
            return Err(QueryError::invalid_filter(
                path,
                format!("{} has no property `{}`", self.entity_name(), head),
            ));
        };

        let Some(sub_field) = rest else {
            return Ok(value.cloned());
        };

        let field = kind
            .component()
            .and_then(|descriptor| descriptor.field(sub_field))
            .ok_or_else(|| {
                QueryError::invalid_filter(
                    path,
                    format!("`{}` has no sub-field `{}`", head, sub_field),
                )
            })?;

        match value {
            Some(value) => read_sub_field(self.entity_name(), path, value, field),
            None => Ok(None),
        }
    }
}

fn read_sub_field(
    entity: &str,
    path: &str,
    value: &Value,
    field: &ComponentField,
) -> QueryResult<Option<Value>> {
    let component = value
        .as_component()
        .ok_or_else(|| QueryError::field_access(entity, path))?;
    field
        .read(component.inner())
        .ok_or_else(|| QueryError::field_access(entity, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exemplar_schema::{Column, ComponentDescriptor, EntityMapping, MappingRegistry, ScalarType};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct UserId {
        site: String,
        name: String,
    }

    #[derive(Debug, Clone)]
    struct User {
        id: Option<UserId>,
        money: Option<i64>,
        admin: bool,
    }

    struct Ticket {
        id: i64,
        seller: Option<i64>,
    }

    struct Tagged {
        tag: String,
    }

    struct BrokenKey {
        key: Option<String>,
    }

    struct Unregistered;

    fn user_id() -> Arc<ComponentDescriptor> {
        ComponentDescriptor::builder::<UserId>("UserId")
            .field("site", |k: &UserId| Some(Value::from(k.site.as_str())))
            .field("name", |k: &UserId| Some(Value::from(k.name.as_str())))
            .build()
            .unwrap()
    }

    fn registry() -> MappingRegistry {
        MappingRegistry::builder()
            .register(
                EntityMapping::<User>::new("User")
                    .composite_id("id", user_id(), |u: &User| u.id.clone())
                    .property(Column::scalar("money", ScalarType::Long), |u: &User| {
                        u.money.map(Value::from)
                    })
                    .property(
                        Column::scalar("admin", ScalarType::Boolean).not_null(),
                        |u: &User| Some(Value::from(u.admin)),
                    ),
            )
            .unwrap()
            .register(
                EntityMapping::<Ticket>::new("Ticket")
                    .id("id", ScalarType::Long, |t: &Ticket| Some(Value::from(t.id)))
                    .property(Column::association("seller", "User").lazy(), |t: &Ticket| {
                        t.seller.map(Value::reference)
                    }),
            )
            .unwrap()
            .register(
                EntityMapping::<Tagged>::new("Tagged")
                    .identifier("tag", TypeKind::Any, |t: &Tagged| Some(Value::from(t.tag.as_str()))),
            )
            .unwrap()
            .register(
                EntityMapping::<BrokenKey>::new("BrokenKey").identifier(
                    "key",
                    TypeKind::Composite(user_id()),
                    |b: &BrokenKey| b.key.clone().map(Value::from),
                ),
            )
            .unwrap()
            .build()
    }

    fn woody() -> User {
        User {
            id: Some(UserId {
                site: "hk".into(),
                name: "woody".into(),
            }),
            money: Some(10),
            admin: false,
        }
    }

    #[test]
    fn test_describe_properties_in_mapping_order() {
        let registry = registry();
        let metadata = EntityMetadata::describe(&woody(), &registry).unwrap();

        assert_eq!(metadata.entity_name(), "User");
        let names: Vec<_> = metadata.properties().iter().map(Property::name).collect();
        assert_eq!(names, vec!["money", "admin"]);
        assert_eq!(metadata.properties()[0].value(), Some(&Value::from(10i64)));
        assert!(metadata.properties()[0].is_nullable());
        assert!(!metadata.properties()[1].is_nullable());
        assert!(metadata.has_composite_identifier());
        assert!(!metadata.has_single_identifier());
    }

    #[test]
    fn test_describe_unregistered_type() {
        let err = EntityMetadata::describe(&Unregistered, &registry()).unwrap_err();
        assert!(err.is_metadata_unavailable());
        assert!(err.message.contains("Unregistered"));
    }

    #[test]
    fn test_identifier_classification() {
        let registry = registry();

        let ticket = EntityMetadata::describe(&Ticket { id: 1, seller: Some(2) }, &registry).unwrap();
        assert!(ticket.has_single_identifier());
        assert!(!ticket.has_composite_identifier());
        assert!(ticket.properties()[0].is_lazy());
        assert!(ticket.properties()[0].kind().is_association());

        let tagged = EntityMetadata::describe(&Tagged { tag: "x".into() }, &registry).unwrap();
        assert!(!tagged.has_single_identifier());
        assert!(!tagged.has_composite_identifier());
    }

    #[test]
    fn test_composite_identifier_values() {
        let metadata = EntityMetadata::describe(&woody(), &registry()).unwrap();

        assert_eq!(
            metadata.composite_identifier_values().unwrap(),
            vec![
                ("id.site".to_string(), Some(Value::from("hk"))),
                ("id.name".to_string(), Some(Value::from("woody"))),
            ]
        );

        let anonymous = User { id: None, ..woody() };
        let metadata = EntityMetadata::describe(&anonymous, &registry()).unwrap();
        assert!(metadata.composite_identifier_values().unwrap().is_empty());
    }

    #[test]
    fn test_composite_identifier_access_violation() {
        let broken = BrokenKey {
            key: Some("not-a-component".into()),
        };
        let metadata = EntityMetadata::describe(&broken, &registry()).unwrap();

        let err = metadata.composite_identifier_values().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::FieldAccess);
        assert_eq!(err.context.field.as_deref(), Some("key.site"));
    }

    #[test]
    fn test_value_at() {
        let metadata = EntityMetadata::describe(&woody(), &registry()).unwrap();

        assert_eq!(metadata.value_at("money").unwrap(), Some(Value::from(10i64)));
        assert_eq!(metadata.value_at("id.name").unwrap(), Some(Value::from("woody")));
        assert!(metadata.value_at("id").unwrap().unwrap().as_component().is_some());
        assert!(metadata.value_at("nope").is_err());
        assert!(metadata.value_at("id.nope").is_err());
        assert!(metadata.value_at("money.cents").is_err());
    }

    #[test]
    fn test_from_class_rejects_foreign_instance() {
        let registry = registry();
        let class = registry.get::<User>().unwrap().clone();
        let err = EntityMetadata::from_class(&Unregistered, class).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Internal);
    }
}
