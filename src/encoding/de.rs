use super::*;

/// Values that can be read as an element from a [`BinaryReader`].
pub trait De: Sized {
    /// Reads the element `name`, which must be the next element of the container the
    /// reader has open.
    ///
    /// # Errors
    ///
    /// Fails if the next element is not named `name`, has the wrong type, or is
    /// malformed.
    fn de(name: &str, r: &mut BinaryReader) -> Result<Self, Error>;
}

/// Reads the remaining elements of the container `r` has open, up to its terminator.
///
/// Later elements replace earlier ones with the same name.
pub(crate) fn de_elements(r: &mut BinaryReader) -> Result<Document, Error> {
    let mut doc = Document::new();
    while let Some(name) = r.peek_name()? {
        let value = Bson::de(&name, r)?;
        doc.insert(name, value);
    }
    Ok(doc)
}

impl De for Document {
    fn de(name: &str, r: &mut BinaryReader) -> Result<Self, Error> {
        r.read_start_embedded_document(name)?;
        let doc = de_elements(r)?;
        r.read_end_document()?;
        Ok(doc)
    }
}

impl De for Vec<Bson> {
    fn de(name: &str, r: &mut BinaryReader) -> Result<Self, Error> {
        r.read_start_array(name)?;
        let mut values = Vec::new();
        while let Some(index) = r.peek_name()? {
            values.push(Bson::de(&index, r)?);
        }
        r.read_end_array()?;
        Ok(values)
    }
}

impl De for JavaScriptWithScope {
    fn de(name: &str, r: &mut BinaryReader) -> Result<Self, Error> {
        let code = r.read_start_javascript_with_scope(name)?;
        r.read_start_document()?;
        let scope = de_elements(r)?;
        r.read_end_document()?;
        Ok(JavaScriptWithScope { code, scope })
    }
}

impl De for Bson {
    fn de(name: &str, r: &mut BinaryReader) -> Result<Self, Error> {
        Ok(match r.peek_type()? {
            ElementType::Double => Bson::Double(r.read_double(name)?),
            ElementType::String => Bson::String(r.read_string(name)?),
            ElementType::Document => Bson::Document(Document::de(name, r)?),
            ElementType::Array => Bson::Array(Vec::de(name, r)?),
            ElementType::Binary => Bson::Binary(r.read_binary(name)?),
            ElementType::ObjectId => Bson::ObjectId(r.read_object_id(name)?),
            ElementType::Boolean => Bson::Boolean(r.read_boolean(name)?),
            ElementType::DateTime => Bson::DateTime(r.read_date_time(name)?),
            ElementType::Null => {
                r.read_null(name)?;
                Bson::Null
            }
            ElementType::RegularExpression => Bson::RegularExpression(r.read_regular_expression(name)?),
            ElementType::JavaScript => Bson::JavaScript(r.read_javascript(name)?),
            ElementType::Symbol => Bson::Symbol(r.read_symbol(name)?),
            ElementType::JavaScriptWithScope => {
                Bson::JavaScriptWithScope(JavaScriptWithScope::de(name, r)?)
            }
            ElementType::Int32 => Bson::Int32(r.read_int32(name)?),
            ElementType::Timestamp => Bson::Timestamp(r.read_timestamp(name)?),
            ElementType::Int64 => Bson::Int64(r.read_int64(name)?),
            ElementType::MinKey => {
                r.read_min_key(name)?;
                Bson::MinKey
            }
            ElementType::MaxKey => {
                r.read_max_key(name)?;
                Bson::MaxKey
            }
            ElementType::EndOfDocument => {
                return Err(Error::ProtocolViolation {
                    operation: "de",
                    state: r.state(),
                })
            }
        })
    }
}
