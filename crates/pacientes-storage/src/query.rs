//! Search query types and their in-process matching semantics.

use pacientes_core::{CoreError, FechaIngreso, Paciente, parse_fecha};
use serde::{Deserialize, Serialize};

/// Text fields of a record that filters can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampoTexto {
    Rut,
    Nombre,
    Apellido,
    Sexo,
    Enfermedad,
}

impl CampoTexto {
    fn value<'a>(&self, paciente: &'a Paciente) -> &'a str {
        match self {
            Self::Rut => &paciente.rut,
            Self::Nombre => &paciente.nombre,
            Self::Apellido => &paciente.apellido,
            Self::Sexo => &paciente.sexo,
            Self::Enfermedad => &paciente.enfermedad,
        }
    }
}

/// One branch of a contains-disjunction: field contains `value`,
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainsTerm {
    pub field: CampoTexto,
    pub value: String,
}

/// A single filter applied to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordFilter {
    /// Matches when any term's field contains its value (case-insensitive
    /// substring). The free-text criteria share one disjunction.
    AnyContains(Vec<ContainsTerm>),
    /// Exact string equality on a field.
    Exact { field: CampoTexto, value: String },
    /// Record admission date at or after the given day.
    FechaDesde(FechaIngreso),
}

impl RecordFilter {
    /// Check if a record matches this filter
    pub fn matches(&self, paciente: &Paciente) -> bool {
        match self {
            Self::AnyContains(terms) => terms.iter().any(|term| {
                term.field
                    .value(paciente)
                    .to_lowercase()
                    .contains(&term.value.to_lowercase())
            }),
            Self::Exact { field, value } => field.value(paciente) == value,
            Self::FechaDesde(desde) => paciente.fecha_ingreso >= *desde,
        }
    }
}

/// A conjunction of filters; an empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub filters: Vec<RecordFilter>,
}

impl SearchQuery {
    pub fn matches(&self, paciente: &Paciente) -> bool {
        self.filters.iter().all(|f| f.matches(paciente))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Sparse search criteria as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    pub nombre: Option<String>,
    pub rut: Option<String>,
    pub sexo: Option<String>,
    #[serde(rename = "fechaIngreso")]
    pub fecha_ingreso: Option<String>,
    pub enfermedad: Option<String>,
}

impl SearchCriteria {
    /// Builds the filter set.
    ///
    /// `nombre` contributes substring terms on both `nombre` and `apellido`;
    /// `rut` joins the same disjunction, so a record passes when any of the
    /// free-text terms hit. `sexo` and `enfermedad` require exact equality
    /// and `fechaIngreso` is an inclusive lower bound. All filters are
    /// AND-combined.
    pub fn to_query(&self) -> Result<SearchQuery, CoreError> {
        let mut filters = Vec::new();

        let mut terms = Vec::new();
        if let Some(nombre) = non_empty(&self.nombre) {
            terms.push(ContainsTerm {
                field: CampoTexto::Nombre,
                value: nombre.to_string(),
            });
            terms.push(ContainsTerm {
                field: CampoTexto::Apellido,
                value: nombre.to_string(),
            });
        }
        if let Some(rut) = non_empty(&self.rut) {
            terms.push(ContainsTerm {
                field: CampoTexto::Rut,
                value: rut.to_string(),
            });
        }
        if !terms.is_empty() {
            filters.push(RecordFilter::AnyContains(terms));
        }

        if let Some(sexo) = non_empty(&self.sexo) {
            filters.push(RecordFilter::Exact {
                field: CampoTexto::Sexo,
                value: sexo.to_string(),
            });
        }
        if let Some(fecha) = non_empty(&self.fecha_ingreso) {
            filters.push(RecordFilter::FechaDesde(parse_fecha(fecha)?));
        }
        if let Some(enfermedad) = non_empty(&self.enfermedad) {
            filters.push(RecordFilter::Exact {
                field: CampoTexto::Enfermedad,
                value: enfermedad.to_string(),
            });
        }

        Ok(SearchQuery { filters })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
