//! Fixed message texts. The first line is the summary; the rest, when
//! present, is the detailed explanation.

pub(crate) const AUTO_VARIABLE_ASSIGNMENT: &str =
    "Address of local auto-variable assigned to a function parameter.\n\
     Dangerous assignment - the function parameter is assigned the address of a local \
     auto-variable. Local auto-variables are reserved from the stack which is freed when \
     the function ends. So the pointer to a local variable is invalid after the function ends.";

pub(crate) const AUTO_VARIABLE_ASSIGNMENT_INCONCLUSIVE: &str =
    "Address of local auto-variable assigned to a function parameter.\n\
     Function parameter is assigned the address of a local auto-variable. Local \
     auto-variables are reserved from the stack which is freed when the function ends. The \
     address is invalid after the function ends and it might 'leak' from the function \
     through the parameter.";

pub(crate) const RETURN_ADDRESS_OF_AUTO_VARIABLE: &str = "Address of an auto-variable returned.";

pub(crate) const RETURN_LOCAL_VARIABLE: &str = "Pointer to local array variable returned.";

pub(crate) const RETURN_REFERENCE: &str = "Reference to auto variable returned.";

pub(crate) const RETURN_TEMP_REFERENCE: &str = "Reference to temporary returned.";

pub(crate) const RETURN_TEMP_POINTER: &str = "Pointer to temporary returned.";

pub(crate) const INVALID_DEALLOCATION: &str =
    "Deallocation of an auto-variable results in undefined behaviour.\n\
     The deallocation of an auto-variable results in undefined behaviour. You should only \
     free memory that has been allocated dynamically.";

pub(crate) fn return_address_of_function_parameter(name: &str) -> String {
    format!(
        "Address of function parameter '{name}' returned.\n\
         Address of the function parameter '{name}' becomes invalid after the function exits \
         because function parameters are stored on the stack which is freed when the function \
         exits. Thus the returned value is invalid."
    )
}
