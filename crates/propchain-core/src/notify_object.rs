#![forbid(unsafe_code)]

//! Schema-driven notifiable objects.
//!
//! An [`ObjectSchema`] is an explicit per-type registration table: it lists
//! which properties a type has and how each behaves. It is built once and
//! shared by every [`NotifyObject`] of that type.
//!
//! | Kind | Readable | Assignable | Publishes on assignment |
//! |------|----------|------------|-------------------------|
//! | observable | yes | yes | yes, on every assignment |
//! | plain | yes | yes | no |
//! | computed | yes (may fail) | no | no |
//!
//! Stored properties start as [`Value::Undefined`]. Observable properties
//! publish every assignment, including no-op ones; consumers that want
//! deduplication apply it themselves.
//!
//! # Usage
//!
//! ```
//! use propchain_core::notify_object::{NotifyObject, ObjectSchema};
//! use propchain_core::value::Value;
//!
//! let schema = ObjectSchema::new("Person")
//!     .observable("name")
//!     .plain("id")
//!     .build();
//! let person = NotifyObject::new(&schema);
//! person.put("name", "Ada").unwrap();
//! assert_eq!(person.read("name"), Ok(Value::from("Ada")));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::object::{AccessError, Notifiable, Object};
use crate::reactive::{Stream, Subject};
use crate::value::Value;

/// Getter for a computed property.
pub type Getter = Rc<dyn Fn(&NotifyObject) -> Result<Value, String>>;

/// How a declared property behaves.
#[derive(Clone)]
pub enum PropertyKind {
    Observable,
    Plain,
    Computed(Getter),
}

impl PropertyKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Observable => "observable",
            Self::Plain => "plain",
            Self::Computed(_) => "computed",
        }
    }
}

impl fmt::Debug for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-type property registration table.
#[derive(Clone, Debug)]
pub struct ObjectSchema {
    type_name: Rc<str>,
    properties: AHashMap<Rc<str>, PropertyKind>,
}

impl ObjectSchema {
    /// Start a schema for `type_name`.
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.into(),
            properties: AHashMap::new(),
        }
    }

    /// Declare a property that publishes its reassignments.
    #[must_use]
    pub fn observable(mut self, name: &str) -> Self {
        self.properties.insert(name.into(), PropertyKind::Observable);
        self
    }

    /// Declare a stored property without notifications.
    #[must_use]
    pub fn plain(mut self, name: &str) -> Self {
        self.properties.insert(name.into(), PropertyKind::Plain);
        self
    }

    /// Declare a read-only property computed on every read. An `Err` from
    /// `getter` surfaces as [`AccessError::Accessor`].
    #[must_use]
    pub fn computed(
        mut self,
        name: &str,
        getter: impl Fn(&NotifyObject) -> Result<Value, String> + 'static,
    ) -> Self {
        self.properties
            .insert(name.into(), PropertyKind::Computed(Rc::new(getter)));
        self
    }

    /// Freeze the schema for sharing.
    #[must_use]
    pub fn build(self) -> Rc<Self> {
        Rc::new(self)
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// How `name` is declared, if at all.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<&PropertyKind> {
        self.properties.get(name)
    }

    /// Whether `name` is an observable property.
    #[must_use]
    pub fn is_observable(&self, name: &str) -> bool {
        matches!(self.kind(name), Some(PropertyKind::Observable))
    }
}

/// An object whose properties are described by an [`ObjectSchema`].
pub struct NotifyObject {
    schema: Rc<ObjectSchema>,
    values: RefCell<AHashMap<Rc<str>, Value>>,
    subjects: AHashMap<Rc<str>, Subject<Value>>,
}

impl NotifyObject {
    /// Create an instance with every stored property `Undefined`.
    #[must_use]
    pub fn new(schema: &Rc<ObjectSchema>) -> Rc<Self> {
        let mut values = AHashMap::new();
        let mut subjects = AHashMap::new();
        for (name, kind) in &schema.properties {
            match kind {
                PropertyKind::Observable => {
                    values.insert(Rc::clone(name), Value::Undefined);
                    subjects.insert(Rc::clone(name), Subject::new());
                }
                PropertyKind::Plain => {
                    values.insert(Rc::clone(name), Value::Undefined);
                }
                PropertyKind::Computed(_) => {}
            }
        }
        Rc::new(Self {
            schema: Rc::clone(schema),
            values: RefCell::new(values),
            subjects,
        })
    }

    /// The schema this object was built from.
    #[must_use]
    pub fn schema(&self) -> &Rc<ObjectSchema> {
        &self.schema
    }

    /// Wrap this object as a [`Value`].
    #[must_use]
    pub fn to_value(self: &Rc<Self>) -> Value {
        Value::Object(Rc::clone(self) as Rc<dyn Object>)
    }

    /// Read a property. Same as [`Object::get`].
    pub fn read(&self, name: &str) -> Result<Value, AccessError> {
        match self.schema.kind(name) {
            None => Err(AccessError::Missing {
                property: name.to_owned(),
            }),
            Some(PropertyKind::Computed(getter)) => {
                let getter = Rc::clone(getter);
                getter(self).map_err(|message| AccessError::Accessor {
                    property: name.to_owned(),
                    message,
                })
            }
            Some(PropertyKind::Observable | PropertyKind::Plain) => Ok(self
                .values
                .borrow()
                .get(name)
                .cloned()
                .unwrap_or_default()),
        }
    }

    /// Assign a property. Same as [`Object::set`] with conversion.
    ///
    /// Observable properties publish the new value after it is stored.
    pub fn put(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let value = value.into();
        let key: Rc<str> = match self.schema.properties.get_key_value(name) {
            None => {
                return Err(AccessError::Missing {
                    property: name.to_owned(),
                });
            }
            Some((_, PropertyKind::Computed(_))) => {
                return Err(AccessError::ReadOnly {
                    property: name.to_owned(),
                });
            }
            Some((key, _)) => Rc::clone(key),
        };
        self.values.borrow_mut().insert(key, value.clone());
        if let Some(subject) = self.subjects.get(name) {
            tracing::trace!(
                object = %self.schema.type_name,
                property = name,
                "publishing property change"
            );
            subject.next(value);
        }
        Ok(())
    }

    /// Live subscribers on an observable property (0 for anything else).
    #[must_use]
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subjects.get(name).map_or(0, Subject::subscriber_count)
    }
}

impl Object for NotifyObject {
    fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        self.read(name)
    }

    fn set(&self, name: &str, value: Value) -> Result<(), AccessError> {
        self.put(name, value)
    }

    fn as_notifiable(&self) -> Option<&dyn Notifiable> {
        if self.subjects.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl Notifiable for NotifyObject {
    fn property_changes(&self, name: &str) -> Option<Stream<Value>> {
        self.subjects.get(name).map(Subject::as_stream)
    }
}

impl fmt::Debug for NotifyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.borrow();
        let mut names: Vec<&Rc<str>> = values.keys().collect();
        names.sort();
        let mut s = f.debug_struct(self.schema.type_name());
        for name in names {
            if let Some(value) = values.get(name) {
                s.field(name, value);
            }
        }
        s.finish()
    }
}
