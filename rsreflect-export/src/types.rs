//! Export type system handed to the reflection generator.

use rsreflect_ast::BuiltinKind;

/// Pixel layout an element describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    User,
    PixelL,
    PixelA,
    PixelLA,
    PixelRGB,
    PixelRGBA,
}

/// Storage type of a primitive, or of each component of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Float16,
    Float32,
    Float64,
    Signed8,
    Signed16,
    Signed32,
    Signed64,
    Unsigned8,
    Unsigned16,
    Unsigned32,
    Unsigned64,
    Boolean,

    // Packed pixel formats
    Unsigned565,
    Unsigned5551,
    Unsigned4444,

    // Runtime object handles
    RSElement,
    RSType,
    RSAllocation,
    RSSampler,
    RSScript,
    RSMesh,
    RSProgramFragment,
    RSProgramVertex,
    RSProgramRaster,
    RSProgramStore,
    RSFont,
}

// Type names whose data type is fixed by the name rather than by the
// underlying builtin
const SPECIFIC_TYPE_NAMES: &[(&str, DataType)] = &[
    ("rs_pixel_rgb565", DataType::Unsigned565),
    ("rs_pixel_rgba5551", DataType::Unsigned5551),
    ("rs_pixel_rgba4444", DataType::Unsigned4444),
    ("rs_element", DataType::RSElement),
    ("rs_type", DataType::RSType),
    ("rs_allocation", DataType::RSAllocation),
    ("rs_sampler", DataType::RSSampler),
    ("rs_script", DataType::RSScript),
    ("rs_mesh", DataType::RSMesh),
    ("rs_program_fragment", DataType::RSProgramFragment),
    ("rs_program_vertex", DataType::RSProgramVertex),
    ("rs_program_raster", DataType::RSProgramRaster),
    ("rs_program_store", DataType::RSProgramStore),
    ("rs_font", DataType::RSFont),
];

impl DataType {
    pub fn from_builtin(kind: BuiltinKind) -> Option<DataType> {
        let data_type = match kind {
            BuiltinKind::Void => return None,
            BuiltinKind::Bool => DataType::Boolean,
            BuiltinKind::Char => DataType::Signed8,
            BuiltinKind::UChar => DataType::Unsigned8,
            BuiltinKind::Short => DataType::Signed16,
            BuiltinKind::UShort => DataType::Unsigned16,
            BuiltinKind::Int => DataType::Signed32,
            BuiltinKind::UInt => DataType::Unsigned32,
            BuiltinKind::Long => DataType::Signed64,
            BuiltinKind::ULong => DataType::Unsigned64,
            BuiltinKind::Half => DataType::Float16,
            BuiltinKind::Float => DataType::Float32,
            BuiltinKind::Double => DataType::Float64,
        };
        Some(data_type)
    }

    /// Data type implied by a script-specific type name
    pub fn from_specific_name(name: &str) -> Option<DataType> {
        SPECIFIC_TYPE_NAMES
            .iter()
            .find(|(specific, _)| *specific == name)
            .map(|(_, data_type)| *data_type)
    }

    pub fn size_in_bits(self) -> u32 {
        match self {
            DataType::Signed8 | DataType::Unsigned8 | DataType::Boolean => 8,
            DataType::Float16
            | DataType::Signed16
            | DataType::Unsigned16
            | DataType::Unsigned565
            | DataType::Unsigned5551
            | DataType::Unsigned4444 => 16,
            DataType::Float32 | DataType::Signed32 | DataType::Unsigned32 => 32,
            DataType::Float64 | DataType::Signed64 | DataType::Unsigned64 => 64,
            // Handles are pointer sized on the 32-bit script target
            _ => 32,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
    }

    pub fn is_signed(self) -> bool {
        self.is_float()
            || matches!(
                self,
                DataType::Signed8 | DataType::Signed16 | DataType::Signed32 | DataType::Signed64
            )
    }

    pub fn is_rs_object(self) -> bool {
        matches!(
            self,
            DataType::RSElement
                | DataType::RSType
                | DataType::RSAllocation
                | DataType::RSSampler
                | DataType::RSScript
                | DataType::RSMesh
                | DataType::RSProgramFragment
                | DataType::RSProgramVertex
                | DataType::RSProgramRaster
                | DataType::RSProgramStore
                | DataType::RSFont
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportPrimitiveType {
    pub name: String,
    pub data_type: DataType,
    pub kind: DataKind,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportVectorType {
    pub name: String,
    /// Component type
    pub data_type: DataType,
    pub size: u32,
    pub kind: DataKind,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportPointerType {
    pub name: String,
    pub pointee: Box<ExportType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportConstantArrayType {
    pub name: String,
    pub element: Box<ExportType>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportField {
    pub name: String,
    pub ty: ExportType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportRecordType {
    pub name: String,
    pub fields: Vec<ExportField>,
}

/// Normalized form of a source type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExportType {
    Primitive(ExportPrimitiveType),
    Pointer(ExportPointerType),
    Vector(ExportVectorType),
    ConstantArray(ExportConstantArrayType),
    Record(ExportRecordType),
}

impl ExportType {
    pub fn name(&self) -> &str {
        match self {
            ExportType::Primitive(t) => &t.name,
            ExportType::Pointer(t) => &t.name,
            ExportType::Vector(t) => &t.name,
            ExportType::ConstantArray(t) => &t.name,
            ExportType::Record(t) => &t.name,
        }
    }

    /// Element kind, for primitives and vectors
    pub fn data_kind(&self) -> Option<DataKind> {
        match self {
            ExportType::Primitive(t) => Some(t.kind),
            ExportType::Vector(t) => Some(t.kind),
            ExportType::Pointer(_) | ExportType::ConstantArray(_) | ExportType::Record(_) => None,
        }
    }

    /// Storage type, for primitives and vectors
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ExportType::Primitive(t) => Some(t.data_type),
            ExportType::Vector(t) => Some(t.data_type),
            ExportType::Pointer(_) | ExportType::ConstantArray(_) | ExportType::Record(_) => None,
        }
    }

    /// Number of components: 1 for primitives, the element count for vectors
    pub fn vector_size(&self) -> Option<u32> {
        match self {
            ExportType::Primitive(_) => Some(1),
            ExportType::Vector(t) => Some(t.size),
            ExportType::Pointer(_) | ExportType::ConstantArray(_) | ExportType::Record(_) => None,
        }
    }

    pub fn is_normalized(&self) -> bool {
        match self {
            ExportType::Primitive(t) => t.normalized,
            ExportType::Vector(t) => t.normalized,
            ExportType::Pointer(_) | ExportType::ConstantArray(_) | ExportType::Record(_) => false,
        }
    }
}
